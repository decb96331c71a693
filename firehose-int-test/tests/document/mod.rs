mod batch_test;
mod document_test;
