use once_cell::sync::Lazy;
use rand::Rng;

pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Letter frequency distribution for English (approximate)
pub static LETTER_DISTRIBUTION: [(char, f32); 26] = [
    ('E', 12.70),
    ('T', 9.05),
    ('A', 8.16),
    ('O', 7.50),
    ('I', 6.96),
    ('N', 6.74),
    ('S', 6.32),
    ('H', 6.09),
    ('R', 5.98),
    ('D', 4.25),
    ('L', 4.02),
    ('C', 2.78),
    ('U', 2.75),
    ('M', 2.40),
    ('W', 2.36),
    ('F', 2.22),
    ('G', 2.01),
    ('Y', 1.97),
    ('P', 1.92),
    ('B', 1.49),
    ('V', 0.97),
    ('K', 0.77),
    ('J', 0.15),
    ('X', 0.15),
    ('Q', 0.09),
    ('Z', 0.07),
];

static CUMULATIVE_DISTRIBUTION: Lazy<Vec<(char, f32)>> = Lazy::new(|| {
    let mut cumulative = 0.0;
    LETTER_DISTRIBUTION
        .iter()
        .map(|(ch, freq)| {
            cumulative += freq;
            (*ch, cumulative)
        })
        .collect()
});

/// Cumulative distribution for weighted random selection
pub fn cumulative_distribution() -> &'static [(char, f32)] {
    &CUMULATIVE_DISTRIBUTION
}

pub fn uniform_letter(rng: &mut impl Rng) -> char {
    ALPHABET[rng.random_range(0..ALPHABET.len())] as char
}

pub fn weighted_letter(rng: &mut impl Rng) -> char {
    let dist = cumulative_distribution();
    let total = dist.last().map_or(0.0, |(_, c)| *c);
    let random_value = rng.random::<f32>() * total;

    dist.iter()
        .find(|(_, cumulative)| random_value <= *cumulative)
        .map_or('E', |(letter, _)| *letter)
}

pub fn is_word_letter(c: char) -> bool {
    c.is_ascii_uppercase()
}
