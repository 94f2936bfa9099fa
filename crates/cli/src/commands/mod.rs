//! Command implementations.

mod bulk;
mod send;
mod version;

pub use bulk::run_bulk;
pub use send::run_send;
pub use version::print_version;

use crate::cli::AccountArgs;
use config_loader::AccountSource;

fn account_source(args: &AccountArgs) -> Option<AccountSource> {
    AccountSource::from_flags(args.test, args.account.clone())
}
