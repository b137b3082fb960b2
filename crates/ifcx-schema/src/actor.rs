//! Actors and ownership: people, organizations, applications, addresses.

use ifcx_step::{Decl, SchemaBuilder};

use crate::{label, text};

pub(crate) fn declare(b: &mut SchemaBuilder) {
    b.entity("IfcActorRole")
        .attribute("Role", Decl::named("IfcRoleEnum"))
        .optional("UserDefinedRole", label())
        .optional("Description", text());

    b.entity("IfcAddress")
        .abstract_entity()
        .optional("Purpose", Decl::named("IfcAddressTypeEnum"))
        .optional("Description", text())
        .optional("UserDefinedPurpose", label());
    b.entity("IfcPostalAddress")
        .subtype_of("IfcAddress")
        .optional("InternalLocation", label())
        .optional("AddressLines", Decl::list(label()))
        .optional("PostalBox", label())
        .optional("Town", label())
        .optional("Region", label())
        .optional("PostalCode", label())
        .optional("Country", label());

    b.entity("IfcPerson")
        .optional("Identification", Decl::named("IfcIdentifier"))
        .optional("FamilyName", label())
        .optional("GivenName", label())
        .optional("MiddleNames", Decl::list(label()))
        .optional("PrefixTitles", Decl::list(label()))
        .optional("SuffixTitles", Decl::list(label()))
        .optional("Roles", Decl::list(Decl::named("IfcActorRole")))
        .optional("Addresses", Decl::list(Decl::named("IfcAddress")));
    b.entity("IfcOrganization")
        .optional("Identification", Decl::named("IfcIdentifier"))
        .attribute("Name", label())
        .optional("Description", text())
        .optional("Roles", Decl::list(Decl::named("IfcActorRole")))
        .optional("Addresses", Decl::list(Decl::named("IfcAddress")));
    b.entity("IfcPersonAndOrganization")
        .attribute("ThePerson", Decl::named("IfcPerson"))
        .attribute("TheOrganization", Decl::named("IfcOrganization"))
        .optional("Roles", Decl::list(Decl::named("IfcActorRole")));
    b.entity("IfcApplication")
        .attribute("ApplicationDeveloper", Decl::named("IfcOrganization"))
        .attribute("Version", label())
        .attribute("ApplicationFullName", label())
        .attribute("ApplicationIdentifier", Decl::named("IfcIdentifier"));

    b.entity("IfcOwnerHistory")
        .attribute("OwningUser", Decl::named("IfcPersonAndOrganization"))
        .attribute("OwningApplication", Decl::named("IfcApplication"))
        .optional("State", Decl::named("IfcStateEnum"))
        .optional("ChangeAction", Decl::named("IfcChangeActionEnum"))
        .optional("LastModifiedDate", Decl::named("IfcTimeStamp"))
        .optional("LastModifyingUser", Decl::named("IfcPersonAndOrganization"))
        .optional("LastModifyingApplication", Decl::named("IfcApplication"))
        .attribute("CreationDate", Decl::named("IfcTimeStamp"));
}
