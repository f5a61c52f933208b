//! Anonymize domain - stable pseudonyms so dialog titles don't expose names.

use sha2::{Digest, Sha256};

use crate::common::MemberId;

const ADJECTIVES: [&str; 5] = ["Unidentified", "Mysterious", "Enigmatic", "Secretive", "Flying"];

const ANIMALS: [&str; 20] = [
    "Octopus", "Kraken", "Dolphin", "Whale", "Shark", "Narwhal", "Jellyfish", "Walrus",
    "Penguin", "Turtle", "Lion", "Tiger", "Dragon", "Phoenix", "Griffin", "Unicorn",
    "Cerberus", "Pegasus", "Vampire", "Werewolf",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymizer;

impl Anonymizer {
    /// "<Adjective> <Animal>" label, the same for a member every time.
    pub fn caption_for(&self, member_id: MemberId) -> String {
        let digest = Sha256::digest(member_id.to_string().as_bytes());
        let hashed = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize;

        let adjective = ADJECTIVES[hashed % ADJECTIVES.len()];
        let animal = ANIMALS[hashed % ANIMALS.len()];
        format!("{} {}", adjective, animal)
    }
}
