pub mod form;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in form::definitions()
        .into_iter()
        .chain(system::definitions())
    {
        registry.register(entry);
    }
}
