//! Grammar productions.

mod expr;
