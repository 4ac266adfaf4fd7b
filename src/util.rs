/*!

  Utils for signal-net development.

*/

use bitvec::slice::BitSlice;

/// Render bits as a string of `0` and `1`, lowest index first.
pub fn bit_string(bits: &BitSlice) -> String {
    bits.iter().map(|b| if *b { '1' } else { '0' }).collect()
}

/// Compare a bit vector against a string of `0`s and `1`s, lowest index first.
#[macro_export]
macro_rules! assert_signals_eq {
    ($bits:expr, $expected:expr $(,)?) => {
        match (&$bits, &$expected) {
            (bits, expected) => {
                assert_eq!($crate::util::bit_string(bits).as_str(), expected.trim());
            }
        }
    };
    ($bits:expr, $expected:expr, $($arg:tt)+) => {
        match (&$bits, &$expected) {
            (bits, expected) => {
                assert_eq!(
                    $crate::util::bit_string(bits).as_str(),
                    expected.trim(),
                    $($arg)+
                );
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use bitvec::prelude::*;

    #[test]
    fn bit_strings() {
        assert_signals_eq!(bitvec![1, 0, 1], "101");
        assert_signals_eq!(bits![0, 0], " 00 ", "padding is ignored");
        assert_eq!(super::bit_string(BitSlice::empty()), "");
    }
}
