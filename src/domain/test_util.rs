use anyhow::anyhow;

/// Simulated connection state for in-memory driven ports, so tests can exercise storage failures
pub enum Connectivity {
    Connected,
    Disconnected,
}

impl Connectivity {
    /// Fails with a storage error while disconnected
    pub fn blow_up_if_disconnected(&self) -> Result<(), anyhow::Error> {
        match self {
            Self::Connected => Ok(()),
            Self::Disconnected => Err(anyhow!("could not connect to the data store!")),
        }
    }
}

/// Records the arguments of every call to a faked function and hands back a canned result.
/// Used by hand-written driving port mocks, since the async trait methods don't play well with
/// mocking libraries.
///
/// * `Args` is whatever gets captured per call, usually a tuple of owned arguments
/// * `Ret` is the function's return type
pub struct FakeImplementation<Args, Ret> {
    saved_arguments: Vec<Args>,
    return_value: Option<Ret>,
}

impl<Args, Ret> FakeImplementation<Args, Ret> {
    pub fn new() -> FakeImplementation<Args, Ret> {
        FakeImplementation {
            saved_arguments: Vec::new(),
            return_value: None,
        }
    }

    pub fn save_arguments(&mut self, arguments: Args) {
        self.saved_arguments.push(arguments)
    }

    /// Arguments captured on each call, in call order
    pub fn calls(&self) -> &[Args] {
        self.saved_arguments.as_slice()
    }
}

impl<Args, Success, Fail> FakeImplementation<Args, Result<Success, Fail>>
where
    Success: Clone,
    Fail: Clone,
{
    pub fn set_returned_result(&mut self, return_value: Result<Success, Fail>) {
        self.return_value = Some(return_value);
    }

    pub fn return_value_result(&self) -> Result<Success, Fail> {
        match self.return_value {
            Some(ref result) => result.clone(),
            None => panic!("Tried to return from a function where the return value wasn't set!"),
        }
    }
}

impl<Args, Success> FakeImplementation<Args, anyhow::Result<Success>>
where
    Success: Clone,
{
    /// [anyhow::Error] can't be cloned, so errors are stored and replayed by message
    pub fn set_returned_anyhow(&mut self, return_value: anyhow::Result<Success>) {
        self.return_value = Some(return_value.map_err(|err| anyhow!(format!("{err}"))));
    }

    pub fn return_value_anyhow(&self) -> anyhow::Result<Success> {
        match self.return_value {
            None => panic!("Tried to return from a function where the value wasn't set!"),
            Some(Ok(ref ok_result)) => Ok(ok_result.clone()),
            Some(Err(ref err)) => Err(anyhow!(format!("{err}"))),
        }
    }
}
