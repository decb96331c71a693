use crate::common::{AUTO_ID_ALPHABET, AUTO_ID_LENGTH};
use rand::rngs::OsRng;
use rand::Rng;

/// Generates a random document id of [`AUTO_ID_LENGTH`] alphanumeric characters.
///
/// Ids carry no ordering; with 62^20 possibilities collisions are not checked.
pub fn auto_id() -> String {
    let mut rng = OsRng;
    (0..AUTO_ID_LENGTH)
        .map(|_| {
            let index = rng.gen_range(0..AUTO_ID_ALPHABET.len());
            AUTO_ID_ALPHABET[index] as char
        })
        .collect()
}
