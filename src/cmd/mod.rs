/*!
Command dispatcher module.

  src/cmd/
    mod.rs        (this file)
    operation.rs  (Operation enum: search | chat | analyze)
    serve.rs      (execute_serve: MCP server over stdio)
    list.rs       (ListArgs + execute_list)
    exec.rs       (ExecArgs + execute_exec)
    shared.rs     (tool metadata, schema-driven argument building, param files)
    format.rs     (human output: boxes, tables, colors)

Conventions:
  - Each subcommand module exposes one public `execute_*` function returning
    `anyhow::Result<()>`.
  - Argument structs derive `clap::Args`.
  - Async work runs on a runtime created inside the `execute_*` function.
*/

pub mod exec;
pub mod format;
pub mod list;
pub mod operation;
pub mod serve;
pub mod shared;

pub use exec::{ExecArgs, execute_exec};
pub use list::{ListArgs, execute_list};
pub use serve::execute_serve;
