//! Day-by-day and activity-by-activity download loops.
//!
//! # Overview
//!
//! Each unit of work is a [`FetchUnit`] derived from a calendar date or an
//! activity id. The [`Fetcher`] issues exactly one request per unit, in order,
//! and waits [`PAGE_DELAY`] after every request. There is no concurrency, no
//! retry and no caching.
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use garmin_core::auth::{AuthFlow, Credentials};
//! use garmin_core::connect::GarminConnect;
//! use garmin_core::fetch::{DailyStat, Fetcher};
//! use garmin_core::rest::Session;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connect = GarminConnect::new(Session::new()?);
//! let auth = AuthFlow::new(&connect, Credentials::new("me@example.com", "secret"))
//!     .login()
//!     .await?;
//! let fetcher = Fetcher::new(connect, auth);
//! let start = NaiveDate::from_ymd_opt(2024, 3, 1).ok_or("bad date")?;
//! let sleep = fetcher.fetch_daily(DailyStat::Sleep, start, 7).await?;
//! assert_eq!(sleep.len(), 7);
//! # Ok(())
//! # }
//! ```

mod error;
mod fetcher;
mod units;

pub use error::FetchError;
pub use fetcher::{Fetcher, PAGE_DELAY};
pub use units::{ActivitySearch, DailyStat, FetchUnit, monitoring_unit};
