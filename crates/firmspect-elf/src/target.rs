//! Target machine profiles.

use crate::constants::*;

/// Size and addressing profile of the target CPU.
///
/// `mausize` is the number of bytes in the minimum addressable unit.
/// `charsize` is the number of bytes in a character: for the C6000 it is 1
/// since four characters pack into a word, while for the C55x data memory is
/// word addressable so a character occupies 2 bytes even though `mausize`
/// is 1 (program memory stays byte addressable).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetProfile {
    pub wordsize: u32,
    pub mausize: u32,
    pub charsize: u32,
    pub ptrsize: u32,
    pub big_endian: bool,
    pub machine: u16,
}

impl TargetProfile {
    /// Resolve a profile from the machine id, the data-encoding byte of
    /// `e_ident` and the file header flags.
    ///
    /// Unknown machines produce an all-zero profile; callers must treat
    /// that as unsupported.
    #[must_use]
    pub fn new(machine: u16, data: u8, flags: u32) -> Self {
        let big_endian = data == ELFDATA2MSB;

        let (wordsize, mausize, charsize, ptrsize) = match machine {
            EM_TI_T16 | EM_TI_C6000 | EM_386 | EM_SPARC | EM_ARM => (4, 1, 1, 4),
            EM_TI_C5500 => {
                // The large-model test was determined by reverse engineering
                // the file header and may be wrong.
                if (flags & 0xf0) == 0xe0 {
                    (2, 1, 2, 4)
                } else {
                    (2, 1, 2, 2)
                }
            }
            EM_TI_C2000 => (2, 2, 2, 2),
            EM_MSP430 => (2, 1, 1, 2),
            _ => (0, 0, 0, 0),
        };

        Self {
            wordsize,
            mausize,
            charsize,
            ptrsize,
            big_endian,
            machine,
        }
    }

    /// Whether the machine id resolved to a known profile.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.wordsize != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_machines() {
        let arm = TargetProfile::new(EM_ARM, ELFDATA2LSB, 0);
        assert_eq!(
            (arm.wordsize, arm.mausize, arm.charsize, arm.ptrsize),
            (4, 1, 1, 4)
        );
        assert!(!arm.big_endian);

        let c2000 = TargetProfile::new(EM_TI_C2000, ELFDATA2LSB, 0);
        assert_eq!(
            (c2000.wordsize, c2000.mausize, c2000.charsize, c2000.ptrsize),
            (2, 2, 2, 2)
        );

        let msp430 = TargetProfile::new(EM_MSP430, ELFDATA2LSB, 0);
        assert_eq!(
            (
                msp430.wordsize,
                msp430.mausize,
                msp430.charsize,
                msp430.ptrsize
            ),
            (2, 1, 1, 2)
        );
    }

    #[test]
    fn test_c55_pointer_size_from_flags() {
        let large = TargetProfile::new(EM_TI_C5500, ELFDATA2LSB, 0xe0);
        assert_eq!(large.ptrsize, 4);

        let small = TargetProfile::new(EM_TI_C5500, ELFDATA2LSB, 0);
        assert_eq!(small.ptrsize, 2);
    }

    #[test]
    fn test_unknown_machine_is_zero_profile() {
        let profile = TargetProfile::new(0xbeef, ELFDATA2LSB, 0);
        assert!(!profile.is_known());
        assert_eq!(profile.wordsize, 0);
        assert_eq!(profile.ptrsize, 0);
    }

    #[test]
    fn test_big_endian_from_data_encoding() {
        let profile = TargetProfile::new(EM_TI_C6000, ELFDATA2MSB, 0);
        assert!(profile.big_endian);
    }
}
