mod conditions;
mod fragments;
