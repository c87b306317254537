use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;

use records::{storage, RecordStore};

#[derive(Debug, Args, Clone)]
pub struct Command {
    /// One user object per line instead of a single object keyed by username.
    #[arg(short, long)]
    lines: bool,
}

pub fn execute_command(path: &str, cmd: &Command) -> Result<()> {
    let store =
        RecordStore::load(storage::open(path)).with_context(|| format!("loading '{}'", path))?;

    dump(&store, cmd, &mut io::stdout().lock())
}

fn dump(store: &RecordStore, cmd: &Command, out: &mut impl Write) -> Result<()> {
    if cmd.lines {
        for user in store.users()? {
            serde_json::to_writer(&mut *out, &user)?;
            out.write_all(b"\n")?;
        }
    } else {
        serde_json::to_writer(&mut *out, &store.list()?)?;
        out.write_all(b"\n")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use records::{storage::JsonFileStorage, User};
    use serde_json::{json, Value};

    use super::*;

    fn seeded_store(dir: &tempfile::TempDir) -> Result<RecordStore> {
        let store = RecordStore::load(Box::new(JsonFileStorage::new(
            dir.path().join("users.json"),
        )))?;
        store.create(User::new("jacob", "1", "Jacob", "Hah"))?;
        store.create(User::new("amy", "2", "Amy", ""))?;
        Ok(store)
    }

    #[test]
    fn it_dumps_a_single_object_keyed_by_username() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = seeded_store(&dir)?;

        let mut out = Vec::new();
        dump(&store, &Command { lines: false }, &mut out)?;

        let text = String::from_utf8(out)?;
        assert_eq!(text.lines().count(), 1);
        let dumped: Value = serde_json::from_str(&text)?;
        assert_eq!(
            dumped,
            json!({
                "amy": { "id": "2", "name": "Amy", "description": "" },
                "jacob": { "id": "1", "name": "Jacob", "description": "Hah" }
            })
        );

        Ok(())
    }

    #[test]
    fn it_dumps_one_user_per_line() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = seeded_store(&dir)?;

        let mut out = Vec::new();
        dump(&store, &Command { lines: true }, &mut out)?;

        let users = String::from_utf8(out)?
            .lines()
            .map(serde_json::from_str::<User>)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(
            users,
            vec![
                User::new("amy", "2", "Amy", ""),
                User::new("jacob", "1", "Jacob", "Hah"),
            ]
        );

        Ok(())
    }
}
