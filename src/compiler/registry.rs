//! Post-order collection of compiled tables.
//!
//! Descriptors stay mutable while the walk runs, because finalizing a HasMany
//! may synthesize a foreign-key column on an already-collected target. They
//! are frozen once emission to the model factory begins.

use std::collections::HashMap;

use log::debug;

use super::descriptor::TableDescriptor;

#[derive(Debug, Default)]
pub(crate) struct TableRegistry {
    tables: Vec<RegisteredTable>,
    by_table_name: HashMap<String, usize>,
}

#[derive(Debug)]
pub(crate) struct RegisteredTable {
    pub model_key: String,
    pub descriptor: TableDescriptor,
}

impl TableRegistry {
    /// Registers a compiled table and returns its index. A table name seen
    /// before resolves to the existing entry, so a table reachable from
    /// several ancestors (a dereferenced document repeats the subtree) stays
    /// one table collecting one foreign-key column per ancestor path.
    pub fn insert(&mut self, model_key: String, descriptor: TableDescriptor) -> usize {
        if let Some(&index) = self.by_table_name.get(&descriptor.table_name) {
            debug!(
                "table `{}` already registered; reusing the existing descriptor",
                descriptor.table_name
            );
            return index;
        }
        let index = self.tables.len();
        self.by_table_name
            .insert(descriptor.table_name.clone(), index);
        self.tables.push(RegisteredTable {
            model_key,
            descriptor,
        });
        index
    }

    pub fn get(&self, index: usize) -> &RegisteredTable {
        &self.tables[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut RegisteredTable {
        &mut self.tables[index]
    }

    pub fn contains_table(&self, table_name: &str) -> bool {
        self.by_table_name.contains_key(table_name)
    }

    /// Consumes the registry in registration (post) order.
    pub fn into_tables(self) -> Vec<RegisteredTable> {
        self.tables
    }
}
