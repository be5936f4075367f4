use crate::command::{Argv, Builtin, Continuation, os_str};
use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Fixed table of builtin commands, built once before the loop starts.
///
/// Lookup is by exact name; the order only matters for `help`, which lists
/// the names as they were registered.
pub struct BuiltinRegistry {
    builtins: Vec<Box<dyn Builtin>>,
}

impl BuiltinRegistry {
    /// The builtin with this exact name, if there is one.
    pub fn get(&self, name: &[u8]) -> Option<&dyn Builtin> {
        self.builtins
            .iter()
            .find(|b| b.name().as_bytes() == name)
            .map(|b| b.as_ref())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.builtins.iter().map(|b| b.name())
    }
}

impl Default for BuiltinRegistry {
    /// `echo`, `pwd`, `ls`, `mkdir`, `cd`, `help` and `exit`.
    fn default() -> Self {
        let builtins: Vec<Box<dyn Builtin>> = vec![
            Box::new(Echo),
            Box::new(Pwd),
            Box::new(Ls),
            Box::new(Mkdir),
            Box::new(Cd),
        ];
        let mut registry = Self { builtins };
        let names = registry.names().chain([Help::NAME, Exit::NAME]).collect();
        registry.builtins.push(Box::new(Help { names }));
        registry.builtins.push(Box::new(Exit));
        registry
    }
}

/// The argument after the command name, or a usage error naming the command.
fn required_arg<'a>(argv: &Argv<'a>, name: &str) -> Result<&'a [u8]> {
    argv.first_arg()
        .ok_or_else(|| anyhow!("expected argument to \"{}\"", name))
}

/// Write the arguments separated by single spaces, then a newline.
pub struct Echo;

impl Builtin for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn execute(&self, argv: &Argv<'_>, stdout: &mut dyn Write) -> Result<Continuation> {
        stdout.write_all(&argv.args().join(&b' '))?;
        stdout.write_all(b"\n")?;
        Ok(Continuation::Continue)
    }
}

/// Print the process working directory.
pub struct Pwd;

impl Builtin for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn execute(&self, _argv: &Argv<'_>, stdout: &mut dyn Write) -> Result<Continuation> {
        let cwd = env::current_dir().context("pwd")?;
        writeln!(stdout, "Current working dir: {}", cwd.display())?;
        Ok(Continuation::Continue)
    }
}

/// List every entry of the working directory, hidden ones included, in the
/// order the OS reports them.
pub struct Ls;

impl Builtin for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn execute(&self, _argv: &Argv<'_>, stdout: &mut dyn Write) -> Result<Continuation> {
        let entries = fs::read_dir(".").context("ls: couldn't open the directory")?;
        // read_dir skips the self and parent links a raw directory stream yields.
        writeln!(stdout, ".")?;
        writeln!(stdout, "..")?;
        for entry in entries {
            let entry = entry.context("ls")?;
            writeln!(stdout, "{}", entry.file_name().to_string_lossy())?;
        }
        Ok(Continuation::Continue)
    }
}

/// Create one directory with mode 0755.
pub struct Mkdir;

impl Builtin for Mkdir {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn execute(&self, argv: &Argv<'_>, _stdout: &mut dyn Write) -> Result<Continuation> {
        let path = os_str(required_arg(argv, self.name())?);
        let path = Path::new(&*path);
        let mut builder = fs::DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }
        builder
            .create(path)
            .with_context(|| format!("mkdir: {}", path.display()))?;
        debug!(path = %path.display(), "created directory");
        Ok(Continuation::Continue)
    }
}

/// Change the process working directory.
pub struct Cd;

impl Builtin for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(&self, argv: &Argv<'_>, _stdout: &mut dyn Write) -> Result<Continuation> {
        let target = os_str(required_arg(argv, self.name())?);
        let target = Path::new(&*target);
        env::set_current_dir(target).with_context(|| format!("cd: {}", target.display()))?;
        debug!(target = %target.display(), "changed directory");
        Ok(Continuation::Continue)
    }
}

/// Print a short banner and the builtin names.
pub struct Help {
    names: Vec<&'static str>,
}

impl Help {
    const NAME: &'static str = "help";
}

impl Builtin for Help {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&self, _argv: &Argv<'_>, stdout: &mut dyn Write) -> Result<Continuation> {
        writeln!(stdout, "minish, a minimal command interpreter")?;
        writeln!(stdout, "Type program names and arguments, and hit enter.")?;
        writeln!(stdout, "The following are built in:")?;
        for name in &self.names {
            writeln!(stdout, "  {}", name)?;
        }
        writeln!(stdout, "Use the man command for information on other programs.")?;
        Ok(Continuation::Continue)
    }
}

/// Leave the shell; arguments are ignored.
pub struct Exit;

impl Exit {
    const NAME: &'static str = "exit";
}

impl Builtin for Exit {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&self, _argv: &Argv<'_>, _stdout: &mut dyn Write) -> Result<Continuation> {
        Ok(Continuation::Terminate)
    }
}
