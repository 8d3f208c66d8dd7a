use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Flags {
    flags: HashMap<String, Flag>,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: String,
    pub long: String,
    pub description: String,
    pub value: Option<String>,
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let mut flags = HashMap::new();

        flags.insert(
            "help".to_string(),
            Flag {
                short: "-h".to_string(),
                long: "--help".to_string(),
                description: "Print this help message".to_string(),
                value: None,
            },
        );

        flags.insert(
            "version".to_string(),
            Flag {
                short: "-v".to_string(),
                long: "--version".to_string(),
                description: "Show version information".to_string(),
                value: None,
            },
        );

        Flags { flags }
    }

    /// Marks every recognized flag found in `args`; unrecognized arguments
    /// are ignored.
    pub fn parse(&mut self, args: &[String]) {
        for arg in args {
            for flag in self.flags.values_mut() {
                if arg == &flag.short || arg == &flag.long {
                    flag.value = Some("true".to_string());
                }
            }
        }
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags
            .get(name)
            .and_then(|f| f.value.as_ref())
            .is_some()
    }

    pub fn print_help(&self) {
        println!("Usage: tandem [OPTIONS]");
        println!("\nOptions:");
        for flag in self.flags.values() {
            println!("  {}, {:<15} {}", flag.short, flag.long, flag.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_flag() {
        let mut flags = Flags::new();
        flags.parse(&["--help".to_string()]);
        assert!(flags.is_set("help"));
        assert!(!flags.is_set("version"));
    }

    #[test]
    fn test_parse_short_flag() {
        let mut flags = Flags::new();
        flags.parse(&["-v".to_string()]);
        assert!(flags.is_set("version"));
    }

    #[test]
    fn test_unknown_arguments_are_ignored() {
        let mut flags = Flags::new();
        flags.parse(&["--frobnicate".to_string(), "extra".to_string()]);
        assert!(!flags.is_set("help"));
        assert!(!flags.is_set("version"));
    }
}
