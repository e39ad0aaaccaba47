use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

pub const FACE_TAG: &str = "face";

/// Well-known machine-readable code formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbology {
    UpcE,
    Code39,
    Code39Mod43,
    Ean13,
    Ean8,
    Code93,
    Code128,
    Pdf417,
    Qr,
    Aztec,
}

impl Symbology {
    pub const ALL: [Symbology; 10] = [
        Symbology::UpcE,
        Symbology::Code39,
        Symbology::Code39Mod43,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::Code93,
        Symbology::Code128,
        Symbology::Pdf417,
        Symbology::Qr,
        Symbology::Aztec,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Symbology::UpcE => "org.gs1.UPC-E",
            Symbology::Code39 => "com.intermec.Code39",
            Symbology::Code39Mod43 => "com.intermec.Code39Mod43",
            Symbology::Ean13 => "org.gs1.EAN-13",
            Symbology::Ean8 => "org.gs1.EAN-8",
            Symbology::Code93 => "com.intermec.Code93",
            Symbology::Code128 => "org.iso.Code128",
            Symbology::Pdf417 => "org.iso.PDF417",
            Symbology::Qr => "org.iso.QRCode",
            Symbology::Aztec => "org.iso.Aztec",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.tag() == tag)
    }

    /// Two-dimensional (matrix or stacked) formats carry arbitrary bytes.
    pub fn is_two_dimensional(&self) -> bool {
        matches!(self, Symbology::Pdf417 | Symbology::Qr | Symbology::Aztec)
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Discriminator carried by every metadata object.
///
/// Unrecognized tags are preserved as [`ObjectType::Other`]; consumers must
/// treat those objects as opaque base metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Face,
    MachineReadableCode(Symbology),
    Other(String),
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Face => FACE_TAG,
            ObjectType::MachineReadableCode(s) => s.tag(),
            ObjectType::Other(tag) => tag,
        }
    }

    pub fn is_face(&self) -> bool {
        matches!(self, ObjectType::Face)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ObjectType::Other(_))
    }

    pub fn symbology(&self) -> Option<Symbology> {
        match self {
            ObjectType::MachineReadableCode(s) => Some(*s),
            _ => None,
        }
    }
}

/// Total: any string maps to a type; unknown tags become `Other`.
impl From<&str> for ObjectType {
    fn from(tag: &str) -> Self {
        if tag == FACE_TAG {
            return ObjectType::Face;
        }
        match Symbology::from_tag(tag) {
            Some(s) => ObjectType::MachineReadableCode(s),
            None => ObjectType::Other(tag.to_string()),
        }
    }
}

impl FromStr for ObjectType {
    type Err = Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(ObjectType::from(tag))
    }
}

impl From<Symbology> for ObjectType {
    fn from(s: Symbology) -> Self {
        ObjectType::MachineReadableCode(s)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(tag: &str) -> ObjectType {
        ObjectType::from(tag)
    }

    #[test]
    fn test_face_tag() {
        assert_eq!(parse("face"), ObjectType::Face);
        assert_eq!(ObjectType::Face.as_str(), "face");
    }

    #[rstest]
    #[case::upce("org.gs1.UPC-E", Symbology::UpcE)]
    #[case::code39("com.intermec.Code39", Symbology::Code39)]
    #[case::code39_mod43("com.intermec.Code39Mod43", Symbology::Code39Mod43)]
    #[case::ean13("org.gs1.EAN-13", Symbology::Ean13)]
    #[case::ean8("org.gs1.EAN-8", Symbology::Ean8)]
    #[case::code93("com.intermec.Code93", Symbology::Code93)]
    #[case::code128("org.iso.Code128", Symbology::Code128)]
    #[case::pdf417("org.iso.PDF417", Symbology::Pdf417)]
    #[case::qr("org.iso.QRCode", Symbology::Qr)]
    #[case::aztec("org.iso.Aztec", Symbology::Aztec)]
    fn test_code_tags(#[case] tag: &str, #[case] expected: Symbology) {
        let ty = parse(tag);
        assert_eq!(ty, ObjectType::MachineReadableCode(expected));
        assert_eq!(ty.symbology(), Some(expected));
        assert_eq!(ty.as_str(), tag);
    }

    #[test]
    fn test_tags_are_distinct() {
        let mut tags: Vec<&str> = Symbology::ALL.iter().map(|s| s.tag()).collect();
        tags.push(FACE_TAG);
        let unique: std::collections::HashSet<_> = tags.iter().collect();
        assert_eq!(unique.len(), tags.len());
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let ty = parse("com.example.DataMatrix");
        assert_eq!(ty, ObjectType::Other("com.example.DataMatrix".to_string()));
        assert_eq!(ty.as_str(), "com.example.DataMatrix");
        assert!(!ty.is_recognized());
        assert_eq!(ty.symbology(), None);
    }

    #[test]
    fn test_from_str_agrees_with_from() {
        let parsed: ObjectType = "org.iso.Aztec".parse().unwrap();
        assert_eq!(parsed, ObjectType::from("org.iso.Aztec"));
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        assert!(!parse("FACE").is_recognized());
    }

    #[test]
    fn test_two_dimensional_formats() {
        let two_d: Vec<_> = Symbology::ALL
            .into_iter()
            .filter(Symbology::is_two_dimensional)
            .collect();
        assert_eq!(two_d, vec![Symbology::Pdf417, Symbology::Qr, Symbology::Aztec]);
    }
}
