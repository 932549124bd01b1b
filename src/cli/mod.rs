mod inspect;
mod organize;

pub use inspect::*;
pub use organize::*;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> anyhow::Result<()>;
}
