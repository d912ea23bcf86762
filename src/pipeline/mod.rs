mod process;
mod promote;

pub use process::{process_joinery, JointProcessError, Phase};
pub use promote::{promote_cluster, promote_joint_candidate};
