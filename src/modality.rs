use std::fmt;

/// Acquisition class of the displayed stack, as far as window/level cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Modality {
    Ct,
    Mr,
    #[default]
    Other,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Ct, Modality::Mr, Modality::Other];

    /// Classifies a DICOM Modality value (`CT`, `MR`, `CTPROTOCOL`, ...).
    pub fn classify(raw: &str) -> Self {
        let value = raw.trim().to_ascii_uppercase();
        if value.starts_with("CT") {
            Modality::Ct
        } else if value.starts_with("MR") {
            Modality::Mr
        } else {
            Modality::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Ct => "CT",
            Modality::Mr => "MR",
            Modality::Other => "OTHER",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_uses_prefix() {
        assert_eq!(Modality::classify(" ct "), Modality::Ct);
        assert_eq!(Modality::classify("MRI"), Modality::Mr);
        assert_eq!(Modality::classify("US"), Modality::Other);
        assert_eq!(Modality::classify(""), Modality::Other);
    }
}
