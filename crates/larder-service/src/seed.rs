//! Demo data.

use chrono::{Duration, SubsecRound, Utc};
use larder_core::{Email, User};

const DEMO_PEOPLE: [(&str, &str); 25] = [
    ("Ada Lovelace", "ada"),
    ("Alan Turing", "alan"),
    ("Barbara Liskov", "barbara"),
    ("Claude Shannon", "claude"),
    ("Dennis Ritchie", "dennis"),
    ("Donald Knuth", "donald"),
    ("Edsger Dijkstra", "edsger"),
    ("Frances Allen", "frances"),
    ("Grace Hopper", "grace"),
    ("Hedy Lamarr", "hedy"),
    ("Ivan Sutherland", "ivan"),
    ("John Backus", "john"),
    ("Ken Thompson", "ken"),
    ("Leslie Lamport", "leslie"),
    ("Margaret Hamilton", "margaret"),
    ("Niklaus Wirth", "niklaus"),
    ("Ole-Johan Dahl", "olejohan"),
    ("Peter Naur", "peter"),
    ("Radia Perlman", "radia"),
    ("Shafi Goldwasser", "shafi"),
    ("Tony Hoare", "tony"),
    ("Ursula Martin", "ursula"),
    ("Vint Cerf", "vint"),
    ("Whitfield Diffie", "whitfield"),
    ("Yukihiro Matsumoto", "yukihiro"),
];

/// Fixed demo users, oldest first, one second apart so the newest-first
/// order is stable.
#[must_use]
pub fn demo_users() -> Vec<User> {
    let base = Utc::now().trunc_subsecs(6) - Duration::seconds(DEMO_PEOPLE.len() as i64);
    DEMO_PEOPLE
        .iter()
        .enumerate()
        .map(|(i, (name, username))| {
            let mut user = User::new(
                *name,
                *username,
                Email::new_unchecked(format!("{username}@larder.test")),
            );
            user.created_at = base + Duration::seconds(i as i64);
            user.updated_at = user.created_at;
            user
        })
        .collect()
}
