//! The five compression strategies.

mod bullet;
mod code_aware;
mod concise;
mod detailed;
mod diff;

pub use bullet::BulletStrategy;
pub use code_aware::{CodeAwareStrategy, MAX_FOLDED_SIGNATURES, extract_code_signatures};
pub use concise::ConciseStrategy;
pub use detailed::DetailedStrategy;
pub use diff::{DIFF_PRESERVED_ELEMENTS, DiffStrategy};
