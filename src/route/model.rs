use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
pub(crate) fn one() -> i64 {
	1
}

#[inline]
pub(crate) fn ten() -> i64 {
	10
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct Paginate {
	/// The page number to return (1-indexed).
	#[validate(range(min = 1, max = 100_000))]
	#[serde(default = "one")]
	pub page: i64,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "ten")]
	pub limit: i64,
}

impl Paginate {
	pub fn offset(&self) -> i64 {
		(self.page - 1) * self.limit
	}
}

/// The pagination envelope returned alongside every list.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	pub page: i64,
	pub limit: i64,
	pub total: i64,
	pub pages: i64,
	pub has_next_page: bool,
	pub has_prev_page: bool,
}

impl Pagination {
	pub fn new(paginate: &Paginate, total: i64) -> Self {
		let pages = if total == 0 {
			0
		} else {
			(total + paginate.limit - 1) / paginate.limit
		};

		Self {
			page: paginate.page,
			limit: paginate.limit,
			total,
			pages,
			has_next_page: paginate.page < pages,
			has_prev_page: paginate.page > 1,
		}
	}
}

/// The `{success, message?, data}` envelope wrapping every successful
/// response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Envelope<T> {
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<Cow<'static, str>>,
	pub data: T,
}

impl<T> Envelope<T> {
	pub fn data(data: T) -> Self {
		Self {
			success: true,
			message: None,
			data,
		}
	}

	pub fn message(message: &'static str, data: T) -> Self {
		Self {
			success: true,
			message: Some(message.into()),
			data,
		}
	}
}

/// An acknowledgement for operations that have no data to return.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Ack {
	pub success: bool,
	pub message: Cow<'static, str>,
}

impl Ack {
	pub fn message(message: &'static str) -> Self {
		Self {
			success: true,
			message: message.into(),
		}
	}
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: Uuid,
}

/// Display names are 2-50 characters of letters and spaces, after trimming.
pub(crate) fn validate_name(name: &str) -> Result<(), ValidationError> {
	let name = name.trim();
	let length = name.chars().count();

	if !(2..=50).contains(&length) {
		return Err(ValidationError::new(
			"name must be between 2 and 50 characters",
		));
	}

	if !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
		return Err(ValidationError::new(
			"name can only contain letters and spaces",
		));
	}

	Ok(())
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::{validate_name, Paginate, Pagination};

	#[test]
	fn test_paginate_bounds() {
		// The upper bounds keep `offset` far away from `i64` overflow.
		assert!(Paginate { page: i64::MAX, limit: 10 }.validate().is_err());
		assert!(Paginate { page: 0, limit: 10 }.validate().is_err());
		assert!(Paginate { page: 1, limit: 101 }.validate().is_err());

		let paginate = Paginate {
			page: 100_000,
			limit: 100,
		};

		assert!(paginate.validate().is_ok());
		assert_eq!(paginate.offset(), 9_999_900);
	}

	#[test]
	fn test_paginate_offset() {
		let mut paginate = Paginate { page: 1, limit: 10 };

		assert_eq!(paginate.offset(), 0);

		paginate.page = 2;

		assert_eq!(paginate.offset(), 10);

		paginate.limit = 5;

		assert_eq!(paginate.offset(), 5);
	}

	#[test]
	fn test_pagination_flags() {
		let paginate = Paginate { page: 1, limit: 10 };
		let pagination = Pagination::new(&paginate, 25);

		assert_eq!(pagination.pages, 3);
		assert!(pagination.has_next_page);
		assert!(!pagination.has_prev_page);

		let paginate = Paginate { page: 3, limit: 10 };
		let pagination = Pagination::new(&paginate, 25);

		assert!(!pagination.has_next_page);
		assert!(pagination.has_prev_page);
	}

	#[test]
	fn test_pagination_exact_multiple() {
		let paginate = Paginate { page: 2, limit: 10 };
		let pagination = Pagination::new(&paginate, 20);

		assert_eq!(pagination.pages, 2);
		assert!(!pagination.has_next_page);
		assert!(pagination.has_prev_page);
	}

	#[test]
	fn test_pagination_empty() {
		let paginate = Paginate { page: 1, limit: 10 };
		let pagination = Pagination::new(&paginate, 0);

		assert_eq!(pagination.total, 0);
		assert_eq!(pagination.pages, 0);
		assert!(!pagination.has_next_page);
		assert!(!pagination.has_prev_page);
	}

	#[test]
	fn test_validate_name() {
		assert!(validate_name("John Smith").is_ok());
		assert!(validate_name("  Jo  ").is_ok());
		assert!(validate_name("J").is_err());
		assert!(validate_name("John3").is_err());
		assert!(validate_name(&"a".repeat(51)).is_err());
	}
}
