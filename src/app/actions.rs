#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move the guess marker by whole percentage points
    Nudge(i16),
    /// Type one digit of the guess
    Digit(u8),
    Erase,
    /// Lock in the marked guess
    Submit,
    Next,
    PlayAgain,
    /// Play again, forgetting which song ended the previous rounds
    NewSession,
    Quit,
}
