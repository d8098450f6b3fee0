//! Schema qualification for job-store table references
//!
//! Rewrites table references that start with the job-store table prefix
//! (e.g. `jobrunr_jobs`) to `schema.table`. The statement is parsed to find
//! which names are tables: relations visited in the AST, `DROP TABLE`/`DROP
//! VIEW` targets, and foreign-key targets. Index names, constraint names, and
//! columns keep their text even when they share the prefix.
//!
//! The schema is spliced in at the token's source position, so everything
//! else in the statement (literals, comments, operators, whitespace) is
//! copied from the input unchanged.

use std::collections::HashSet;
use std::ops::ControlFlow;

use sqlparser::ast::{
    visit_relations, ColumnOption, CreateTable, ForeignKeyConstraint, ObjectName,
    ObjectNamePart, ObjectType, Statement, TableConstraint,
};
use sqlparser::dialect::DuckDbDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Location, Token, Tokenizer, Word};

use crate::error::{SqlError, SqlResult};

/// Qualifies job-store table references with an optional schema.
#[derive(Debug, Clone)]
pub struct SchemaQualifier {
    /// Target schema, `None` when statements pass through unchanged
    schema: Option<String>,
    /// Prefix shared by the job-store tables
    prefix: String,
}

impl SchemaQualifier {
    /// Create a qualifier. An empty schema name counts as no schema.
    pub fn new(schema: Option<&str>, prefix: impl Into<String>) -> Self {
        Self {
            schema: schema.filter(|s| !s.is_empty()).map(str::to_string),
            prefix: prefix.into(),
        }
    }

    /// The configured schema, if any
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// The table-name prefix that marks job-store tables
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Fully-qualified name for `table` (`schema.table`, or `table` alone).
    pub fn qualify_table_name(&self, table: &str) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{table}"),
            None => table.to_string(),
        }
    }

    /// Rewrite job-store table references in `sql`.
    ///
    /// Without a schema, or when nothing matches, the input is returned
    /// byte-for-byte. Statements the parser does not understand fall back
    /// to the token stream alone: every prefixed name is qualified except the
    /// name after `INDEX [IF NOT EXISTS]` or `CONSTRAINT`.
    pub fn qualify(&self, sql: &str) -> SqlResult<String> {
        let Some(schema) = self.schema.as_deref() else {
            return Ok(sql.to_string());
        };

        let dialect = DuckDbDialect {};
        let tokens = Tokenizer::new(&dialect, sql)
            .with_unescape(false)
            .tokenize_with_location()
            .map_err(|e| SqlError::TokenizeError {
                message: e.to_string(),
            })?;

        let tables = match Parser::parse_sql(&dialect, sql) {
            Ok(statements) => Some(self.table_names(&statements)),
            Err(e) => {
                log::debug!("Qualifying by tokens only, statement did not parse: {e}");
                None
            }
        };

        let mut insert_at = Vec::new();
        let mut previous: Option<&Token> = None;
        let mut in_name_position = false;

        for item in &tokens {
            let token = &item.token;
            if let Token::Word(word) = token {
                let already_qualified = matches!(previous, Some(Token::Period));
                let is_table = match &tables {
                    Some(names) => names.contains(&word.value),
                    None => !in_name_position && self.has_prefix(word),
                };
                if !already_qualified && is_table {
                    insert_at.push(byte_offset(sql, item.span.start)?);
                }
                in_name_position = match word.keyword {
                    Keyword::INDEX | Keyword::CONSTRAINT => true,
                    Keyword::IF | Keyword::NOT | Keyword::EXISTS => in_name_position,
                    _ => false,
                };
            }
            if !matches!(token, Token::Whitespace(_)) {
                previous = Some(token);
            }
        }

        if insert_at.is_empty() {
            return Ok(sql.to_string());
        }
        let mut rewritten = String::with_capacity(sql.len() + insert_at.len() * (schema.len() + 1));
        let mut copied = 0;
        for offset in insert_at {
            rewritten.push_str(&sql[copied..offset]);
            rewritten.push_str(schema);
            rewritten.push('.');
            copied = offset;
        }
        rewritten.push_str(&sql[copied..]);
        Ok(rewritten)
    }

    /// Unqualified job-store table names referenced by `statements`.
    fn table_names(&self, statements: &[Statement]) -> HashSet<String> {
        let mut names = HashSet::new();
        for statement in statements {
            let _ = visit_relations(statement, |relation| {
                self.collect(relation, &mut names);
                ControlFlow::<()>::Continue(())
            });
            match statement {
                Statement::Drop {
                    object_type: ObjectType::Table | ObjectType::View,
                    names: dropped,
                    ..
                } => {
                    for name in dropped {
                        self.collect(name, &mut names);
                    }
                }
                Statement::CreateTable(create) => {
                    for foreign_key in foreign_keys(create) {
                        self.collect(&foreign_key.foreign_table, &mut names);
                    }
                }
                _ => {}
            }
        }
        names
    }

    fn collect(&self, name: &ObjectName, names: &mut HashSet<String>) {
        if let [ObjectNamePart::Identifier(ident)] = name.0.as_slice() {
            if ident.value.starts_with(&self.prefix) {
                names.insert(ident.value.clone());
            }
        }
    }

    fn has_prefix(&self, word: &Word) -> bool {
        word.value.starts_with(&self.prefix)
    }
}

/// Column-level and table-level `REFERENCES` clauses of a `CREATE TABLE`.
fn foreign_keys(create: &CreateTable) -> impl Iterator<Item = &ForeignKeyConstraint> {
    let column_level = create
        .columns
        .iter()
        .flat_map(|column| &column.options)
        .filter_map(|option| match &option.option {
            ColumnOption::ForeignKey(foreign_key) => Some(foreign_key),
            _ => None,
        });
    let table_level = create
        .constraints
        .iter()
        .filter_map(|constraint| match constraint {
            TableConstraint::ForeignKey(foreign_key) => Some(foreign_key),
            _ => None,
        });
    column_level.chain(table_level)
}

/// Byte offset of a tokenizer location (1-based line, 1-based char column).
fn byte_offset(sql: &str, location: Location) -> SqlResult<usize> {
    let out_of_range = || SqlError::TokenizeError {
        message: format!(
            "token position {}:{} is outside the statement",
            location.line, location.column
        ),
    };
    let line = usize::try_from(location.line).map_err(|_| out_of_range())?;
    let column = usize::try_from(location.column).map_err(|_| out_of_range())?;
    if line == 0 || column == 0 {
        return Err(out_of_range());
    }

    let line_start = if line == 1 {
        0
    } else {
        sql.match_indices('\n')
            .nth(line - 2)
            .map(|(i, _)| i + 1)
            .ok_or_else(out_of_range)?
    };
    sql[line_start..]
        .char_indices()
        .nth(column - 1)
        .map(|(i, _)| line_start + i)
        .ok_or_else(out_of_range)
}

#[cfg(test)]
#[path = "qualify_test.rs"]
mod tests;
