/// One identifier record. Ids are dense and 1-based, assigned in
/// first-insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord {
    pub id: usize,
    pub name: String,
    pub ty: String,
    pub scope: String,
}

/// The identifier table the tokenizer populates while scanning.
///
/// The table holds at most one record per (name, scope) pair. The upsert
/// rule is deliberately unusual: re-sighting a recorded name in any scope
/// promotes the record to "global", collapsing per-function scoping into
/// a single flat namespace for the visualizer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    records: Vec<SymbolRecord>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SymbolRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Type of `name` in `scope`, falling back to "global".
    pub fn lookup(&self, name: &str, scope: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|record| record.name == name && record.scope == scope)
            .or_else(|| {
                self.records
                    .iter()
                    .find(|record| record.name == name && record.scope == "global")
            })
            .map(|record| record.ty.as_str())
    }

    /// Records an assignment target.
    ///
    /// If `name` already exists in any scope, the existing record is
    /// promoted to "global" and its type overwritten unless the new
    /// inference is "unknown". Records typed "function" or "class" are
    /// never demoted. Otherwise a new record is inserted in `scope`.
    pub fn upsert(&mut self, name: &str, ty: &str, scope: &str) {
        if let Some(record) = self.records.iter_mut().find(|record| record.name == name) {
            if record.ty == "function" || record.ty == "class" {
                return;
            }
            record.scope = "global".to_string();
            if ty != "unknown" {
                record.ty = ty.to_string();
            }
            return;
        }
        let id = self.records.len() + 1;
        self.records.push(SymbolRecord {
            id,
            name: name.to_string(),
            ty: ty.to_string(),
            scope: scope.to_string(),
        });
    }

    /// Records a `def`/`class` declaration: type forced to `ty`, scope
    /// forced to "global" regardless of the enclosing lexical scope.
    pub fn declare_callable(&mut self, name: &str, ty: &str) {
        if let Some(record) = self.records.iter_mut().find(|record| record.name == name) {
            record.ty = ty.to_string();
            record.scope = "global".to_string();
            return;
        }
        let id = self.records.len() + 1;
        self.records.push(SymbolRecord {
            id,
            name: name.to_string(),
            ty: ty.to_string(),
            scope: "global".to_string(),
        });
    }
}
