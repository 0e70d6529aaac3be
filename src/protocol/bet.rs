//! Bet record value type.
//!
//! A plain five-field value constructed from an ordered source record and
//! immutable afterward. Equality is exact-string equality on all fields.

/// One betting record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bet {
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// National document number.
    pub document: String,
    /// Birth date (as it appears in the source file, e.g. `1999-03-17`).
    pub birth_date: String,
    /// Bet number.
    pub number: String,
}

impl Bet {
    /// Create a bet from its five fields.
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        document: impl Into<String>,
        birth_date: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            document: document.into(),
            birth_date: birth_date.into(),
            number: number.into(),
        }
    }

    /// Build a bet from an ordered 5-field record, in source-file order:
    /// name, surname, document, birth date, number.
    pub fn from_record(record: [String; 5]) -> Self {
        let [name, surname, document, birth_date, number] = record;
        Self {
            name,
            surname,
            document,
            birth_date,
            number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_record_field_order() {
        let bet = Bet::from_record([
            "Juan".to_string(),
            "Perez".to_string(),
            "30904465".to_string(),
            "1999-03-17".to_string(),
            "7574".to_string(),
        ]);

        assert_eq!(bet.name, "Juan");
        assert_eq!(bet.surname, "Perez");
        assert_eq!(bet.document, "30904465");
        assert_eq!(bet.birth_date, "1999-03-17");
        assert_eq!(bet.number, "7574");
    }

    #[test]
    fn test_equality_is_exact() {
        let a = Bet::new("Juan", "Perez", "30904465", "1999-03-17", "7574");
        let b = a.clone();
        assert_eq!(a, b);

        let c = Bet::new("Juan", "Perez", "30904465", "1999-03-17", "7575");
        assert_ne!(a, c);
    }
}
