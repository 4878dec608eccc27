/// The registration form schema
///
/// Every field the form collects is a `FieldName` variant. The document key,
/// label, control kind and required flag all hang off the enum so adding a
/// field is a one-place change.

use std::fmt;

/// Kind of input control a field is rendered with.
///
/// Checkboxes produce boolean values, every other control produces text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Text,
    Tel,
    Email,
    Date,
    Number,
    Select(&'static [Choice]),
    Checkbox,
}

/// One option of a select control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    /// Value stored in the record
    pub value: &'static str,
    /// Text shown in the drop-down
    pub label: &'static str,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// A mobile number is at most this many digits
pub const MOBILE_MAX_DIGITS: usize = 11;

const fn choice(value: &'static str, label: &'static str) -> Choice {
    Choice { value, label }
}

pub const BLOOD_GROUPS: &[Choice] = &[
    choice("A+", "A+"),
    choice("A-", "A-"),
    choice("B+", "B+"),
    choice("B-", "B-"),
    choice("AB+", "AB+"),
    choice("AB-", "AB-"),
    choice("O+", "O+"),
    choice("O-", "O-"),
];

pub const COST_CENTERS: &[Choice] = &[
    choice("2500", "শুরু থেকে ২০১৪ (২৫০০/=টাকা মাত্র)"),
    choice("2000", "২০১৫ থেকে ২০২০ (২০০০/=টাকা মাত্র)"),
    choice("1000", "২০২১ থেকে বর্তমান (১০০০/=টাকা মাত্র)"),
];

/// All fields collected by the form, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    NameBangla,
    NameEnglish,
    FatherName,
    MotherName,
    PresentAddress,
    PermanentAddress,
    DakhilSession,
    Mobile,
    Email,
    Dob,
    BloodGroup,
    Nid,
    JobAndTitle,
    GuestCount,
    CostCenter,
    SingleSelect,
    Option1,
    Option2,
}

impl FieldName {
    pub const ALL: [FieldName; 18] = [
        FieldName::NameBangla,
        FieldName::NameEnglish,
        FieldName::FatherName,
        FieldName::MotherName,
        FieldName::PresentAddress,
        FieldName::PermanentAddress,
        FieldName::DakhilSession,
        FieldName::Mobile,
        FieldName::Email,
        FieldName::Dob,
        FieldName::BloodGroup,
        FieldName::Nid,
        FieldName::JobAndTitle,
        FieldName::GuestCount,
        FieldName::CostCenter,
        FieldName::SingleSelect,
        FieldName::Option1,
        FieldName::Option2,
    ];

    /// Key used in the persisted document
    pub fn key(self) -> &'static str {
        match self {
            FieldName::NameBangla => "nameBangla",
            FieldName::NameEnglish => "nameEnglish",
            FieldName::FatherName => "fatherName",
            FieldName::MotherName => "motherName",
            FieldName::PresentAddress => "presentAddress",
            FieldName::PermanentAddress => "permanentAddress",
            FieldName::DakhilSession => "dakhilSession",
            FieldName::Mobile => "mobile",
            FieldName::Email => "email",
            FieldName::Dob => "dob",
            FieldName::BloodGroup => "bloodGroup",
            FieldName::Nid => "nid",
            FieldName::JobAndTitle => "jobAndTitle",
            FieldName::GuestCount => "guestCount",
            FieldName::CostCenter => "costCenter",
            FieldName::SingleSelect => "singleSelect",
            FieldName::Option1 => "option1",
            FieldName::Option2 => "option2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldName::NameBangla => "নাম (বাংলায়)",
            FieldName::NameEnglish => "নাম (ইংরেজিতে)",
            FieldName::FatherName => "পিতার নাম (বাংলায়)",
            FieldName::MotherName => "মাতার নাম (বাংলায়)",
            FieldName::PresentAddress => {
                "বর্তমান ঠিকানা: গ্রাম/ মহল্লা-পোস্ট কোড-থানা-জেলা-দেশ"
            }
            FieldName::PermanentAddress => "স্থায়ী ঠিকানা: গ্রাম/ মহল্লা-পোস্ট কোড-থানা-জেলা",
            FieldName::DakhilSession => "দাখিল সেশন",
            FieldName::Mobile => "মোবাইল নম্বর",
            FieldName::Email => "ইমেইল",
            FieldName::Dob => "জন্ম তারিখ",
            FieldName::BloodGroup => "রক্তের গ্রুপ",
            FieldName::Nid => "জাতীয় পরিচয়পত্র নং",
            FieldName::JobAndTitle => "পেশা এবং পদবি",
            FieldName::GuestCount => "অতিথি সংখ্যা (প্রতি অতিথির জন্য ৭০০ টাকা দিতে হবে)",
            FieldName::CostCenter => "রেজিস্ট্রেশন ফি এর জন্য শিক্ষার্ষ নির্বাচন করুন",
            FieldName::SingleSelect => "Single Select Option",
            FieldName::Option1 => "Option 1",
            FieldName::Option2 => "Option 2",
        }
    }

    pub fn control(self) -> Control {
        match self {
            FieldName::Mobile => Control::Tel,
            FieldName::Email => Control::Email,
            FieldName::Dob => Control::Date,
            FieldName::Nid | FieldName::GuestCount => Control::Number,
            FieldName::BloodGroup => Control::Select(BLOOD_GROUPS),
            FieldName::CostCenter => Control::Select(COST_CENTERS),
            FieldName::SingleSelect | FieldName::Option1 | FieldName::Option2 => {
                Control::Checkbox
            }
            _ => Control::Text,
        }
    }

    /// Filter raw keyboard input down to what the control accepts.
    ///
    /// Number inputs keep only ASCII digits. The phone input does the same
    /// and is capped at `MOBILE_MAX_DIGITS`.
    pub fn constrain_input(self, input: String) -> String {
        match self.control() {
            Control::Number => input.chars().filter(char::is_ascii_digit).collect(),
            Control::Tel => input
                .chars()
                .filter(char::is_ascii_digit)
                .take(MOBILE_MAX_DIGITS)
                .collect(),
            _ => input,
        }
    }

    /// Selects and checkboxes may be left untouched
    pub fn is_required(self) -> bool {
        !matches!(self.control(), Control::Select(_) | Control::Checkbox)
    }

    /// Required fields, in display order
    pub fn required() -> impl Iterator<Item = FieldName> {
        Self::ALL.into_iter().filter(|field| field.is_required())
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
