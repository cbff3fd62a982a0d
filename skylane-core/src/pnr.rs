use rand::Rng;

const PNR_LEN: usize = 8;
const PNR_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate an 8-character uppercase alphanumeric locator.
///
/// Collisions are not checked here; the reservation store enforces PNR
/// uniqueness and surfaces a collision as an insert failure.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..PNR_LEN)
        .map(|_| PNR_ALPHABET[rng.gen_range(0..PNR_ALPHABET.len())] as char)
        .collect()
}
