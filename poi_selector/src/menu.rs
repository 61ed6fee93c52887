/// Hook into the surrounding multi-page menu.
pub trait Menu {
    /// Hand control to the next page.
    fn set_next_active(&mut self);
}
