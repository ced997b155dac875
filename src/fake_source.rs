//! Realistic strings and identifiers for generated records.

use fake::faker::internet::en::{DomainSuffix, IPv4, UserAgent};
use fake::faker::lorem::en::Word;
use fake::Fake;
use rand::Rng;

/// Source of fake identifiers and free-form strings.
///
/// All draws go through the caller's RNG so that a seeded run is
/// reproducible end to end.
pub trait FakeSource {
    /// A random (version 4) UUID in hyphenated form.
    fn uuid<R: Rng + ?Sized>(&self, rng: &mut R) -> String;

    fn ipv4<R: Rng + ?Sized>(&self, rng: &mut R) -> String;

    fn user_agent<R: Rng + ?Sized>(&self, rng: &mut R) -> String;

    fn uri<R: Rng + ?Sized>(&self, rng: &mut R) -> String;
}

/// [`FakeSource`] backed by the `fake` crate's English locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faker;

impl FakeSource for Faker {
    fn uuid<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string()
    }

    fn ipv4<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        IPv4().fake_with_rng(rng)
    }

    fn user_agent<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        UserAgent().fake_with_rng(rng)
    }

    fn uri<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let host: String = Word().fake_with_rng(rng);
        let suffix: String = DomainSuffix().fake_with_rng(rng);
        let section: String = Word().fake_with_rng(rng);
        let scheme = if rng.gen_bool(0.5) { "https" } else { "http" };
        format!("{}://www.{}.{}/{}/", scheme, host, suffix, section)
    }
}
