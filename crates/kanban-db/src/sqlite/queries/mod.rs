mod attachments;
mod columns;
mod tasks;
