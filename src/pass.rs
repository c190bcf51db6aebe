//! Canonical in-memory representation of a wallet pass.
//!
//! `pass.json` is loosely typed: field values may be numbers or strings,
//! optional sections may be missing entirely, and the pass style is encoded
//! as "whichever of five sub-objects happens to be present". The
//! [`archive`](crate::archive) module normalizes all of that into the types
//! below, so the layout engine never has to deal with absent-vs-empty or
//! stringly-typed enums.
//!
//! Everything here is plain data: constructed once by the normalizer,
//! immutable afterwards, consumed by [`render`](crate::render).

use std::collections::BTreeMap;

/// The five pass styles, with the payload only a boarding pass carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassStyle {
    BoardingPass { transit_type: Option<TransitType> },
    Coupon,
    EventTicket,
    Generic,
    StoreCard,
}

impl PassStyle {
    /// Manifest keys in detection priority order.
    pub const DETECTION_ORDER: [&'static str; 5] = [
        "boardingPass",
        "coupon",
        "eventTicket",
        "generic",
        "storeCard",
    ];

    /// The `pass.json` key holding this style's field sections.
    pub fn manifest_key(&self) -> &'static str {
        match self {
            PassStyle::BoardingPass { .. } => "boardingPass",
            PassStyle::Coupon => "coupon",
            PassStyle::EventTicket => "eventTicket",
            PassStyle::Generic => "generic",
            PassStyle::StoreCard => "storeCard",
        }
    }

    /// Human-readable label shown under the pass title.
    ///
    /// Boarding passes substitute the transit type when it is one of the
    /// known `PKTransitType*` values; anything else keeps the generic label.
    pub fn display_label(&self) -> &'static str {
        match self {
            PassStyle::BoardingPass { transit_type } => match transit_type {
                Some(TransitType::Air) => "Air Boarding Pass",
                Some(TransitType::Train) => "Train Ticket",
                Some(TransitType::Bus) => "Bus Ticket",
                Some(TransitType::Boat) => "Boat Ticket",
                Some(TransitType::Generic) => "Transit Pass",
                Some(TransitType::Other(_)) | None => "Boarding Pass",
            },
            PassStyle::Coupon => "Coupon",
            PassStyle::EventTicket => "Event Ticket",
            PassStyle::Generic => "Generic Pass",
            PassStyle::StoreCard => "Store Card",
        }
    }
}

/// Boarding pass transit sub-type (`PKTransitType*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitType {
    Air,
    Boat,
    Bus,
    Generic,
    Train,
    /// Unrecognized value, kept verbatim.
    Other(String),
}

impl TransitType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PKTransitTypeAir" => TransitType::Air,
            "PKTransitTypeBoat" => TransitType::Boat,
            "PKTransitTypeBus" => TransitType::Bus,
            "PKTransitTypeGeneric" => TransitType::Generic,
            "PKTransitTypeTrain" => TransitType::Train,
            other => TransitType::Other(other.to_string()),
        }
    }
}

/// A field value: `pass.json` allows either a number or a string.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

/// `PKDateStyle*` buckets, used independently for the date and time parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    None,
    Short,
    Medium,
    Long,
    Full,
}

impl DateStyle {
    /// Returns `None` for strings that are not a `PKDateStyle*` constant.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PKDateStyleNone" => Some(DateStyle::None),
            "PKDateStyleShort" => Some(DateStyle::Short),
            "PKDateStyleMedium" => Some(DateStyle::Medium),
            "PKDateStyleLong" => Some(DateStyle::Long),
            "PKDateStyleFull" => Some(DateStyle::Full),
            _ => None,
        }
    }
}

/// `PKNumberStyle*` hint for numeric values without a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    Decimal,
    Percent,
    Scientific,
    SpellOut,
}

impl NumberStyle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PKNumberStyleDecimal" => Some(NumberStyle::Decimal),
            "PKNumberStylePercent" => Some(NumberStyle::Percent),
            "PKNumberStyleScientific" => Some(NumberStyle::Scientific),
            "PKNumberStyleSpellOut" => Some(NumberStyle::SpellOut),
            _ => None,
        }
    }
}

/// Horizontal alignment of a field inside its grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlignment {
    #[default]
    Natural,
    Left,
    Center,
    Right,
}

impl TextAlignment {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PKTextAlignmentLeft" => TextAlignment::Left,
            "PKTextAlignmentCenter" => TextAlignment::Center,
            "PKTextAlignmentRight" => TextAlignment::Right,
            _ => TextAlignment::Natural,
        }
    }
}

/// A single labeled datum in one of the five field sections.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub label: Option<String>,
    pub value: FieldValue,
    pub currency_code: Option<String>,
    pub date_style: Option<DateStyle>,
    pub time_style: Option<DateStyle>,
    pub number_style: Option<NumberStyle>,
    pub text_alignment: TextAlignment,
}

impl Field {
    /// A plain text field with no formatting hints.
    pub fn text(key: &str, label: Option<&str>, value: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.map(String::from),
            value: FieldValue::Text(value.to_string()),
            currency_code: None,
            date_style: None,
            time_style: None,
            number_style: None,
            text_alignment: TextAlignment::Natural,
        }
    }

    /// Whether the value should go through date parsing.
    pub fn has_date_hint(&self) -> bool {
        self.date_style.is_some() || self.time_style.is_some()
    }
}

/// The five ordered field sections. Absent sections are empty, never missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSections {
    pub header: Vec<Field>,
    pub primary: Vec<Field>,
    pub secondary: Vec<Field>,
    pub auxiliary: Vec<Field>,
    pub back: Vec<Field>,
}

/// Barcode symbologies accepted by `pass.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeFormat {
    Qr,
    Pdf417,
    Aztec,
    Code128,
}

impl BarcodeFormat {
    const VENDOR_PREFIX: &'static str = "PKBarcodeFormat";

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.strip_prefix(Self::VENDOR_PREFIX)? {
            "QR" => Some(BarcodeFormat::Qr),
            "PDF417" => Some(BarcodeFormat::Pdf417),
            "Aztec" => Some(BarcodeFormat::Aztec),
            "Code128" => Some(BarcodeFormat::Code128),
            _ => None,
        }
    }

    /// Format name with the `PKBarcodeFormat` prefix stripped.
    pub fn display_name(self) -> &'static str {
        match self {
            BarcodeFormat::Qr => "QR",
            BarcodeFormat::Pdf417 => "PDF417",
            BarcodeFormat::Aztec => "Aztec",
            BarcodeFormat::Code128 => "Code128",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barcode {
    pub message: String,
    pub format: BarcodeFormat,
    pub alt_text: Option<String>,
    pub encoding: Option<String>,
}

/// Semantic image roles. Each maps to `{stem}.png`, `{stem}@2x.png`, `{stem}@3x.png`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageRole {
    Logo,
    Icon,
    Strip,
    Background,
    Thumbnail,
    Footer,
}

impl ImageRole {
    pub const ALL: [ImageRole; 6] = [
        ImageRole::Logo,
        ImageRole::Icon,
        ImageRole::Strip,
        ImageRole::Background,
        ImageRole::Thumbnail,
        ImageRole::Footer,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            ImageRole::Logo => "logo",
            ImageRole::Icon => "icon",
            ImageRole::Strip => "strip",
            ImageRole::Background => "background",
            ImageRole::Thumbnail => "thumbnail",
            ImageRole::Footer => "footer",
        }
    }
}

/// Best-resolution image payload per role. Payloads are never decoded here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet {
    images: BTreeMap<ImageRole, Vec<u8>>,
}

impl ImageSet {
    pub fn insert(&mut self, role: ImageRole, bytes: Vec<u8>) {
        self.images.insert(role, bytes);
    }

    pub fn get(&self, role: ImageRole) -> Option<&[u8]> {
        self.images.get(&role).map(Vec::as_slice)
    }

    /// Roles that have a payload, in role order.
    pub fn roles(&self) -> impl Iterator<Item = ImageRole> + '_ {
        self.images.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// The normalized pass handed from the archive normalizer to the layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPass {
    pub style: PassStyle,
    pub organization_name: String,
    pub description: String,
    pub logo_text: Option<String>,
    pub serial_number: Option<String>,
    pub fields: FieldSections,
    pub barcode: Option<Barcode>,
    pub images: ImageSet,
    pub foreground_color: Option<String>,
    pub background_color: Option<String>,
    pub label_color: Option<String>,
    pub relevant_date: Option<String>,
    pub expiration_date: Option<String>,
    /// The full `pass.json` document, for keys not promoted above.
    pub raw: serde_json::Value,
}

impl ParsedPass {
    /// Transit type, only ever set on boarding passes.
    pub fn transit_type(&self) -> Option<&TransitType> {
        match &self.style {
            PassStyle::BoardingPass { transit_type } => transit_type.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boarding_pass_label_uses_known_transit_type() {
        let style = PassStyle::BoardingPass {
            transit_type: Some(TransitType::Train),
        };
        assert_eq!(style.display_label(), "Train Ticket");
    }

    #[test]
    fn boarding_pass_label_falls_back_for_unknown_transit() {
        let style = PassStyle::BoardingPass {
            transit_type: Some(TransitType::parse("PKTransitTypeZeppelin")),
        };
        assert_eq!(style.display_label(), "Boarding Pass");

        let style = PassStyle::BoardingPass { transit_type: None };
        assert_eq!(style.display_label(), "Boarding Pass");
    }

    #[test]
    fn transit_type_keeps_unknown_values() {
        assert_eq!(
            TransitType::parse("PKTransitTypeZeppelin"),
            TransitType::Other("PKTransitTypeZeppelin".to_string())
        );
        assert_eq!(TransitType::parse("PKTransitTypeAir"), TransitType::Air);
    }

    #[test]
    fn manifest_keys_follow_detection_order() {
        let styles = [
            PassStyle::BoardingPass { transit_type: None },
            PassStyle::Coupon,
            PassStyle::EventTicket,
            PassStyle::Generic,
            PassStyle::StoreCard,
        ];
        let keys: Vec<&str> = styles.iter().map(PassStyle::manifest_key).collect();
        assert_eq!(keys, PassStyle::DETECTION_ORDER);
    }

    #[test]
    fn barcode_format_requires_vendor_prefix() {
        assert_eq!(
            BarcodeFormat::parse("PKBarcodeFormatQR"),
            Some(BarcodeFormat::Qr)
        );
        assert_eq!(
            BarcodeFormat::parse("PKBarcodeFormatPDF417"),
            Some(BarcodeFormat::Pdf417)
        );
        assert_eq!(BarcodeFormat::parse("QR"), None);
        assert_eq!(BarcodeFormat::parse("PKBarcodeFormatEAN13"), None);
    }

    #[test]
    fn barcode_display_name_strips_prefix() {
        assert_eq!(BarcodeFormat::Aztec.display_name(), "Aztec");
        assert_eq!(BarcodeFormat::Code128.display_name(), "Code128");
    }

    #[test]
    fn date_style_rejects_unknown_constants() {
        assert_eq!(DateStyle::parse("PKDateStyleShort"), Some(DateStyle::Short));
        assert_eq!(DateStyle::parse("short"), None);
    }

    #[test]
    fn text_alignment_defaults_to_natural() {
        assert_eq!(TextAlignment::parse("PKTextAlignmentRight"), TextAlignment::Right);
        assert_eq!(TextAlignment::parse("sideways"), TextAlignment::Natural);
    }

    #[test]
    fn image_set_lists_roles_in_order() {
        let mut images = ImageSet::default();
        images.insert(ImageRole::Thumbnail, vec![2]);
        images.insert(ImageRole::Icon, vec![1]);
        let roles: Vec<ImageRole> = images.roles().collect();
        assert_eq!(roles, vec![ImageRole::Icon, ImageRole::Thumbnail]);
        assert_eq!(images.get(ImageRole::Icon), Some(&[1u8][..]));
        assert_eq!(images.get(ImageRole::Logo), None);
    }
}
