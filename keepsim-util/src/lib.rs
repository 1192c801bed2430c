//! Utilities

// Modules
pub mod logger;

// Imports
use std::{cell::RefCell, fmt};

/// [`fmt::Display`] helper to display using a `FnMut(&mut fmt::Formatter)`
pub struct DisplayWrapper<F: FnMut(&mut fmt::Formatter) -> fmt::Result>(RefCell<F>);

impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> DisplayWrapper<F> {
	/// Creates a new display wrapper
	#[must_use]
	pub const fn new(func: F) -> Self {
		Self(RefCell::new(func))
	}
}

impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> fmt::Display for DisplayWrapper<F> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		// Note: `f` cannot be re-entrant, so this cannot fail
		self.0.borrow_mut()(f)
	}
}

#[cfg(test)]
mod tests {
	use {super::DisplayWrapper, std::fmt::Write};

	#[test]
	fn display_wrapper_calls_closure() {
		let mut calls = 0;
		let wrapper = DisplayWrapper::new(|f| {
			calls += 1;
			write!(f, "apps: {}", 3)
		});

		let mut s = String::new();
		write!(s, "{wrapper}").expect("Unable to format");
		write!(s, "/{wrapper}").expect("Unable to format");
		drop(wrapper);

		assert_eq!(s, "apps: 3/apps: 3");
		assert_eq!(calls, 2);
	}
}
