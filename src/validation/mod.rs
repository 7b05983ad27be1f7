pub mod highlight;
pub mod text;
pub mod validator;

pub use text::{decimal_comma, normalize, ExpectedValue, UnitTemplate};
pub use validator::{
    assert_row_contains, FieldExpectation, FieldValidator, ValidationOutcome, OXYGEN_LABEL,
    OXYGEN_TEMPLATE,
};
