pub mod relu;
pub mod sigmoid;
pub mod tanh;

pub(crate) use relu::relu_op;
pub(crate) use sigmoid::sigmoid_op;
pub(crate) use tanh::tanh_op;

#[cfg(test)]
#[path = "activation_test.rs"]
mod tests;
