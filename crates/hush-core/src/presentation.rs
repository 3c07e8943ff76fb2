use serde::Serialize;

/// How a displayed notification is surfaced by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Presentation {
    pub alert: bool,
    pub badge: bool,
    pub sound: bool,
}

impl Presentation {
    /// Nothing surfaced
    pub const SILENT: Self = Self {
        alert: false,
        badge: false,
        sound: false,
    };

    /// Banner, badge and sound
    pub const FULL: Self = Self {
        alert: true,
        badge: true,
        sound: true,
    };

    /// Build from option names such as `["alert", "badge"]`
    ///
    /// Unknown names are ignored.
    #[must_use]
    pub fn from_options<T: AsRef<str>>(options: &[T]) -> Self {
        let mut presentation = Self::SILENT;
        for option in options {
            match option.as_ref().trim() {
                "alert" => presentation.alert = true,
                "badge" => presentation.badge = true,
                "sound" => presentation.sound = true,
                other => log::warn!("Unknown presentation option: {other}"),
            }
        }
        presentation
    }

    #[must_use]
    pub fn is_silent(self) -> bool {
        self == Self::SILENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_options() {
        let p = Presentation::from_options(&["badge", "sound"]);
        assert!(!p.alert);
        assert!(p.badge);
        assert!(p.sound);
    }

    #[test]
    fn test_unknown_and_empty_options() {
        assert!(Presentation::from_options(&["vibrate"]).is_silent());
        assert!(Presentation::from_options::<String>(&[]).is_silent());
        assert_eq!(
            Presentation::from_options(&["alert", "badge", "sound"]),
            Presentation::FULL
        );
    }
}
