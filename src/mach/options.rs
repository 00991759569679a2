use serde::{Deserialize, Serialize};

/// Machine architecture and start-up choices.
///
/// The coder and the machine must agree on these; pcode carries the
/// `signature` of the options it was coded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Width and height of the canvas in turtle units.
    pub canvas_start_size: i32,
    pub setup_default_key_buffer: bool,
    /// Keep turtle attributes in global slots 0 to 4.
    pub turtle_attributes_as_globals: bool,
    /// Zero-fill non-parameter locals on routine entry.
    pub initialise_locals: bool,
    #[serde(rename = "allowCSTR")]
    pub allow_cstr: bool,
    pub separate_return_stack: bool,
    pub separate_memory_control_stack: bool,
    pub separate_subroutine_register_stack: bool,
}

/// Number of global slots reserved for turtle attributes.
pub const TURTLE_SLOTS: usize = 5;

/// Largest canvas a machine will create.
pub const MAX_CANVAS: i32 = 10_000;

/// Keys held by the default key buffer.
pub const DEFAULT_KEY_BUFFER: usize = 32;

impl Default for Options {
    fn default() -> Options {
        Options {
            canvas_start_size: 1000,
            setup_default_key_buffer: true,
            turtle_attributes_as_globals: false,
            initialise_locals: true,
            allow_cstr: true,
            separate_return_stack: true,
            separate_memory_control_stack: true,
            separate_subroutine_register_stack: true,
        }
    }
}

impl Options {
    /// CRC-32 over the little-endian canvas size then one byte per flag.
    pub fn signature(&self) -> u32 {
        let mut bytes = self.canvas_start_size.to_le_bytes().to_vec();
        bytes.extend(
            [
                self.setup_default_key_buffer,
                self.turtle_attributes_as_globals,
                self.initialise_locals,
                self.allow_cstr,
                self.separate_return_stack,
                self.separate_memory_control_stack,
                self.separate_subroutine_register_stack,
            ]
            .iter()
            .map(|flag| *flag as u8),
        );
        crc::crc32::checksum_ieee(&bytes)
    }

    /// First global slot free for program variables.
    pub fn global_base(&self) -> usize {
        if self.turtle_attributes_as_globals {
            TURTLE_SLOTS
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_tracks_every_field() {
        let base = Options::default();
        let variants = [
            Options { canvas_start_size: 500, ..base },
            Options { setup_default_key_buffer: false, ..base },
            Options { turtle_attributes_as_globals: true, ..base },
            Options { initialise_locals: false, ..base },
            Options { allow_cstr: false, ..base },
            Options { separate_return_stack: false, ..base },
            Options { separate_memory_control_stack: false, ..base },
            Options { separate_subroutine_register_stack: false, ..base },
        ];
        for variant in variants.iter() {
            assert_ne!(variant.signature(), base.signature());
        }
        assert_eq!(base.signature(), Options::default().signature());
    }

    #[test]
    fn test_json_defaults_and_names() {
        let options: Options = match serde_json::from_str(r#"{"allowCSTR": false, "canvasStartSize": 400}"#) {
            Ok(options) => options,
            Err(e) => panic!("{}", e),
        };
        assert!(!options.allow_cstr);
        assert_eq!(options.canvas_start_size, 400);
        assert!(options.initialise_locals);
        let json = serde_json::to_string(&Options::default()).unwrap_or_default();
        assert!(json.contains("\"separateSubroutineRegisterStack\":true"));
        assert!(json.contains("\"allowCSTR\":true"));
    }
}
