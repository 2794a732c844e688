use thiserror::Error;

/// A rejected submission. The display text is what the API returns to the
/// caller, so each variant maps to exactly one user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields (title, preparationTime, servings, steps, ingredients) are required.")]
    MissingFields,

    #[error("Title must be a non-empty string (max 100 characters).")]
    InvalidTitle,

    #[error("Steps must be a non-empty string (max 1000 characters).")]
    InvalidSteps,

    #[error("Recipe image is required.")]
    MissingImage,

    #[error("preparationTime must be an integer between 1 and 1000.")]
    InvalidPreparationTime,

    #[error("servings must be an integer between 1 and 100.")]
    InvalidServings,

    #[error("Ingredients must be a non-empty array of valid ingredient objects.")]
    InvalidIngredients,

    #[error("Ingredient '{0}' is listed more than once.")]
    DuplicateIngredient(String),

    #[error("Ingredient name must be a non-empty string containing at least one letter.")]
    InvalidIngredientName,

    #[error("Rating must be an integer between 1 and 5.")]
    InvalidRating,

    #[error("Notes must be a string with max 200 characters.")]
    InvalidNotes,

    #[error("Favorite must be true or false.")]
    InvalidFavorite,
}
