//! Symbol interning.
//!
//! The heap keeps one symbol table, a dict held by a permanent root and
//! created on first use. Interning a symbol looks it up with
//! create-on-absent: the key stored in the table is the canonical symbol,
//! and it is flagged interned so that comparisons between two interned
//! symbols reduce to identity.

use crate::core::{Handle, Heap};
use crate::errors::Result;
use crate::types::pair::car;
use crate::types::symbol::set_interned;
use tracing::debug;

impl Heap {
    fn symbol_table(&self) -> Result<Handle<'_>> {
        if let Some(id) = self.symbol_table.get() {
            let table = self.roots.borrow().get(id);
            return Ok(Handle::new(self, table));
        }
        let table = self.dict()?;
        let id = self.roots.borrow_mut().put(table.get());
        self.symbol_table.set(Some(id));
        debug!("symbol table created");
        Ok(table)
    }

    /// The canonical interned symbol with the same bytes as `symbol`.
    ///
    /// If no such symbol exists yet, `symbol` itself becomes canonical.
    pub fn intern(&self, symbol: &Handle<'_>) -> Result<Handle<'_>> {
        if symbol.as_symbol()?.is_interned() {
            return Ok(Handle::new(self, symbol.get()));
        }
        let table = self.symbol_table()?;
        let entry = table.as_dict()?.entry(symbol)?;
        let key = car(self, entry.get());
        set_interned(self, key);
        Ok(Handle::new(self, key))
    }

    pub fn intern_bytes(&self, bytes: impl AsRef<[u8]>) -> Result<Handle<'_>> {
        let symbol = self.symbol(bytes)?;
        self.intern(&symbol)
    }

    pub fn intern_str(&self, name: &str) -> Result<Handle<'_>> {
        self.intern_bytes(name)
    }

    /// Number of distinct interned symbols.
    pub fn interned_count(&self) -> usize {
        match self.symbol_table.get() {
            Some(id) => {
                let table = self.roots.borrow().get(id);
                crate::types::dict::dict(self, table).len
            }
            None => 0,
        }
    }
}
