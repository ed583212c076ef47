/// This is the command used in all the examples.
///
/// Not part of the API and can change at any time.
#[doc(hidden)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Add(pub char);

impl crate::Command for Add {
    type Target = String;

    fn apply(&mut self, string: &mut String) {
        string.push(self.0);
    }

    fn revert(&mut self, string: &mut String) {
        self.0 = string.pop().unwrap();
    }

    fn caption(&self) -> String {
        format!("add '{}'", self.0)
    }
}
