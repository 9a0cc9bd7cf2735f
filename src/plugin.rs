use crate::entry::LiteralCode;
use crate::error::GenError;
use std::io::Write;

/// Boundary to downstream, domain-specific generators. `pre_generate` runs
/// before any code is emitted and may rename output symbols or attach plugin
/// data, but must not reorder or delete entries; `post_generate` runs after
/// all core declarations are written and may append further code.
pub trait Plugin {
    fn pre_generate(&mut self, code: &mut LiteralCode) -> Result<(), GenError>;

    fn post_generate(&mut self, out: &mut dyn Write, code: &LiteralCode) -> Result<(), GenError>;
}

/// Compose plugins in registration order; the first failure aborts the run.
#[derive(Default)]
pub struct PluginList {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Plugin for PluginList {
    fn pre_generate(&mut self, code: &mut LiteralCode) -> Result<(), GenError> {
        for plugin in &mut self.plugins {
            plugin.pre_generate(code)?;
        }
        Ok(())
    }

    fn post_generate(&mut self, out: &mut dyn Write, code: &LiteralCode) -> Result<(), GenError> {
        for plugin in &mut self.plugins {
            plugin.post_generate(out, code)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag(&'static str);

    impl Plugin for Tag {
        fn pre_generate(&mut self, code: &mut LiteralCode) -> Result<(), GenError> {
            let roots = code.literal_constants.clone();
            for id in roots {
                let name = format!("{}{}", self.0, code.entry(id).name);
                code.entry_mut(id).name = name;
            }
            Ok(())
        }

        fn post_generate(
            &mut self,
            out: &mut dyn Write,
            _code: &LiteralCode,
        ) -> Result<(), GenError> {
            writeln!(out, "// appended by {}", self.0)?;
            Ok(())
        }
    }

    struct Failing;

    impl Plugin for Failing {
        fn pre_generate(&mut self, _code: &mut LiteralCode) -> Result<(), GenError> {
            Err(GenError::Plugin("broken".to_string()))
        }

        fn post_generate(
            &mut self,
            _out: &mut dyn Write,
            _code: &LiteralCode,
        ) -> Result<(), GenError> {
            Ok(())
        }
    }

    #[test]
    fn test_plugins_run_in_registration_order() {
        let mut list = PluginList::new();
        list.register(Box::new(Tag("a_")));
        list.register(Box::new(Tag("b_")));
        let mut code = LiteralCode::new();
        let id = code.new_literal_constant();
        code.entry_mut(id).name = "X".to_string();
        list.pre_generate(&mut code).unwrap();
        assert_eq!(code.entry(id).name, "b_a_X");

        let mut buf: Vec<u8> = Vec::new();
        list.post_generate(&mut buf, &code).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "// appended by a_\n// appended by b_\n"
        );
    }

    #[test]
    fn test_first_failure_aborts() {
        let mut list = PluginList::new();
        list.register(Box::new(Failing));
        list.register(Box::new(Tag("never_")));
        let mut code = LiteralCode::new();
        let id = code.new_literal_constant();
        code.entry_mut(id).name = "X".to_string();
        assert!(list.pre_generate(&mut code).is_err());
        assert_eq!(code.entry(id).name, "X");
    }
}
