/// A marker type indicating that a model is **not yet trained**.
///
/// Used as the state parameter of [`LinearModel`](crate::model::linear::LinearModel):
/// prediction is only available once the model has been converted to
/// [`Fitted`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unfitted;

/// A marker type indicating that a model has been **fully trained**.
///
/// A `Fitted` model contains only inference parameters (coefficients and
/// intercept) and can be persisted inside a
/// [`ModelBundle`](crate::model::bundle::ModelBundle).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fitted;
