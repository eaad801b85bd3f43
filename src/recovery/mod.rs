//! 恢复策略：根据保存结果决定下一步（关闭窗口、重新登录确认或自动复位）。
//!
//! Recovery policy for the save control.
//!
//! Exactly one recovery path runs per completed request, and none of them resubmits.

pub mod affordance;
pub mod driver;
pub mod machine;

pub use affordance::{Affordance, Tone};
pub use driver::{SaveDriver, Ui};
pub use machine::{
    AfterSuccess, Effect, Event, SaveMachine, SaveOutcome, SavePolicy, SaveState, TimerId,
};
