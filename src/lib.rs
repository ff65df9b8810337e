//! Mad Libs: a word game played from plain-text story libraries.
//!
//! Story libraries (`*.mlb`) hold stories whose blanks are written as
//! `(descriptor)`. The parser splits each story into literal fragments and
//! blanks, the player supplies a word per blank, and the renderer stitches
//! the finished story back together.

pub mod core;
pub mod schema;
