//! Business logic for the service. Each submodule defines its entities, the driven ports it needs
//! from persistence (`driven_ports`) and the operations it offers to the API layer (`driving_ports`).

pub mod todo;
pub mod user;

#[cfg(test)]
mod test_util;
