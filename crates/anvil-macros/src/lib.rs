//! Procedural macros for the Anvil command framework.
//!
//! This crate provides:
//!
//! - `#[derive(CommandChoice)]` - Lists the members of a field-less enum so it
//!   can back an enum-typed command option
//!
//! # CommandChoice Derive Macro
//!
//! ```rust,ignore
//! use anvil::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Copy, Serialize, Deserialize, CommandChoice)]
//! pub enum Coin {
//!     Heads,
//!     #[choice(name = "Tails (reverse)")]
//!     Tails,
//! }
//!
//! // Offers one choice per member
//! let side = cmd.option(choice_option::<Coin>("side", "Which side"));
//! ```
//!
//! The enum must also implement `Serialize` and `Deserialize`; the serialized
//! form is what travels on the wire as the choice value.

mod choice;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `CommandChoice` for a field-less enum.
///
/// Generates:
/// - `members() -> Vec<Self>` - Every variant, in declaration order
/// - `canonical_name(&self) -> &'static str` - The variant identifier, or the
///   value of `#[choice(name = "...")]`
///
/// # Attributes
///
/// - `#[choice(crate = "...")]` on the enum - Path to the core crate when it is
///   only reachable through a re-export, e.g. `#[choice(crate = "anvil::core")]`
/// - `#[choice(name = "...")]` on a variant - Override its canonical name
#[proc_macro_derive(CommandChoice, attributes(choice))]
pub fn derive_command_choice(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    choice::derive_command_choice(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
