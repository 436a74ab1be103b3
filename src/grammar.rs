//! Compiles `grammar.pest` (§4.3) into a `pest` parser at build time.

use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct RosterGrammar;
