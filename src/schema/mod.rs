mod edge;
mod node;
mod prop;

pub use edge::EdgeSchema;
pub use node::NodeSchema;
pub use prop::{
    AnyProp, BoolProp, DynProp, FloatProp, IntProp, PropComparisons, PropDescriptor, StringProp,
};
