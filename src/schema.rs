//! Static description of the contact schema: every field the extractor may
//! fill, its value kind, and the option sets for constrained fields.
//! Drives prompt construction (`prompts.rs`) and column mapping
//! (`store/fields.rs`). Option lists are configuration, not protocol.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// The identifying field. Exactly one per schema.
    Title,
    RichText,
    Email,
    Phone,
    /// Single choice from a closed option set; out-of-set values are dropped.
    Select,
    /// Open vocabulary with a preferred option set; accepts one value or a list.
    MultiSelect,
    /// Passed through verbatim as a start date.
    Date,
}

impl FieldKind {
    /// Kind label shown to the model in the extraction prompt.
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Title => "title",
            FieldKind::RichText => "rich_text",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone_number",
            FieldKind::Select => "select",
            FieldKind::MultiSelect => "multi_select",
            FieldKind::Date => "date",
        }
    }
}

pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub options: &'static [&'static str],
}

pub const TAG_OPTIONS: &[&str] = &[
    "Angel in Labs",
    "Bank",
    "BD",
    "Crypto",
    "Data & Analytics",
    "Deal",
    "Fintech",
    "Founder/CEO",
    "Investor",
    "Investor in Labs",
    "Legal",
    "Media",
    "Operating Partner",
    "PE",
    "PR",
    "Product",
    "Quarterly Updates",
    "Recruiter",
    "SAB/IC",
    "SPV",
    "Telecom",
    "Treasury Management",
    "VC",
];

pub const CATEGORY_OPTIONS: &[&str] = &[
    "Investors",
    "Founders",
    "Partners",
    "Press",
    "Service Providers",
    "Personal",
];

pub const SCHEMA: &[FieldSpec] = &[
    FieldSpec { name: "Name", kind: FieldKind::Title, options: &[] },
    FieldSpec { name: "Company/Org", kind: FieldKind::RichText, options: &[] },
    FieldSpec { name: "One-liner", kind: FieldKind::RichText, options: &[] },
    FieldSpec { name: "Role/Title", kind: FieldKind::RichText, options: &[] },
    FieldSpec { name: "Location", kind: FieldKind::RichText, options: &[] },
    FieldSpec { name: "Email", kind: FieldKind::Email, options: &[] },
    FieldSpec { name: "Phone", kind: FieldKind::Phone, options: &[] },
    FieldSpec { name: "Tags", kind: FieldKind::MultiSelect, options: TAG_OPTIONS },
    FieldSpec { name: "Notes", kind: FieldKind::RichText, options: &[] },
    FieldSpec { name: "Met How/Where", kind: FieldKind::RichText, options: &[] },
    FieldSpec { name: "Met Date", kind: FieldKind::Date, options: &[] },
    FieldSpec { name: "Introduced By", kind: FieldKind::RichText, options: &[] },
    FieldSpec { name: "LinkedIn", kind: FieldKind::RichText, options: &[] },
    FieldSpec { name: "Category", kind: FieldKind::Select, options: CATEGORY_OPTIONS },
];
