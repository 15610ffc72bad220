//! Name lists for sample trees
//!
//! Nordic given names, surnames and parishes, picked with a caller-supplied
//! RNG so a seed always gives the same tree.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::Gender;

const MALE_FIRST_NAMES: &[&str] = &[
    "Anders", "Johan", "Erik", "Lars", "Karl", "Per", "Nils", "Olof", "Jonas",
    "Gustaf", "Carl", "Sven", "Magnus", "Anders Petter", "Jöns", "Håkan",
    "Petter", "Måns", "Isak", "Jakob", "Mikael", "Daniel", "Fredrik", "August",
    "Axel", "Oskar", "Emil", "Hans", "Mats", "Pål", "Ola", "Knut", "Gunnar",
];

const FEMALE_FIRST_NAMES: &[&str] = &[
    "Anna", "Maria", "Kristina", "Karin", "Brita", "Margareta", "Elsa",
    "Ingrid", "Kajsa", "Stina", "Greta", "Sara", "Helena", "Elin", "Johanna",
    "Ulrika", "Hedvig", "Lovisa", "Sofia", "Charlotta", "Ida", "Hilda",
    "Emma", "Augusta", "Beata", "Cecilia", "Märta", "Sigrid", "Astrid",
];

const SURNAMES: &[&str] = &[
    "Andersson", "Johansson", "Karlsson", "Nilsson", "Eriksson", "Larsson",
    "Olsson", "Persson", "Svensson", "Gustafsson", "Pettersson", "Jonsson",
    "Lindberg", "Lindqvist", "Berg", "Holm", "Sjöberg", "Ström", "Ek",
    "Lind", "Dahl", "Hedlund", "Nordin", "Åberg", "Björk", "Forsberg",
    "Wikström", "Sandberg", "Engström", "Lundgren", "Falk", "Grön",
];

const PLACES: &[&str] = &[
    "Uppsala", "Falun", "Mora", "Västerås", "Örebro", "Linköping", "Kalmar",
    "Växjö", "Lund", "Ystad", "Visby", "Gävle", "Sundsvall", "Umeå",
    "Härnösand", "Karlstad", "Åmål", "Vänersborg", "Skara", "Jönköping",
    "Norrköping", "Nyköping", "Eskilstuna", "Strängnäs", "Sala",
];

/// Given name matching a gender; anyone not female draws from the male list
pub fn random_first_name<R: Rng + ?Sized>(rng: &mut R, gender: Gender) -> &'static str {
    let list = match gender {
        Gender::Female => FEMALE_FIRST_NAMES,
        _ => MALE_FIRST_NAMES,
    };
    list.choose(rng).copied().unwrap_or("Unknown")
}

pub fn random_surname<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    SURNAMES.choose(rng).copied().unwrap_or("Unknown")
}

/// All parish names, in a fixed order
pub fn places() -> &'static [&'static str] {
    PLACES
}
